//! The closed set of wrapper kinds the host can see.
//!
//! Every wrapper type is a [`WrapperKind`] variant known at compile time.
//! Kinds are registered with the host in [`KindGroup`] order when a runtime
//! loads.

use std::fmt;

/// A wrapper type exposed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WrapperKind {
    /// Read-only mapping from names to descriptors.
    ByNameMap,
    /// Read-only mapping from field numbers to descriptors.
    ByNumberMap,
    /// Read-only sequence of descriptors.
    GenericSequence,
    /// A pool of loaded schema definitions.
    DescriptorPool,
    /// A message type descriptor.
    Descriptor,
    /// An enum type descriptor.
    EnumDescriptor,
    /// A single enum value descriptor.
    EnumValueDescriptor,
    /// A field descriptor.
    FieldDescriptor,
    /// A schema file descriptor.
    FileDescriptor,
    /// A service method descriptor.
    MethodDescriptor,
    /// A oneof descriptor.
    OneofDescriptor,
    /// A service descriptor.
    ServiceDescriptor,
    /// A message instance.
    Message,
    /// A holder owning exactly one native arena.
    Arena,
}

/// Registration groups, in the order a runtime registers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KindGroup {
    /// Descriptor containers (maps and sequences).
    Containers,
    /// The descriptor pool.
    Pool,
    /// All descriptor kinds.
    Descriptors,
    /// Message instances.
    Messages,
    /// The arena holder.
    Arena,
}

impl KindGroup {
    /// All groups in registration order.
    pub const ALL: [KindGroup; 5] = [
        KindGroup::Containers,
        KindGroup::Pool,
        KindGroup::Descriptors,
        KindGroup::Messages,
        KindGroup::Arena,
    ];
}

impl WrapperKind {
    /// Every wrapper kind.
    pub const ALL: [WrapperKind; 14] = [
        WrapperKind::ByNameMap,
        WrapperKind::ByNumberMap,
        WrapperKind::GenericSequence,
        WrapperKind::DescriptorPool,
        WrapperKind::Descriptor,
        WrapperKind::EnumDescriptor,
        WrapperKind::EnumValueDescriptor,
        WrapperKind::FieldDescriptor,
        WrapperKind::FileDescriptor,
        WrapperKind::MethodDescriptor,
        WrapperKind::OneofDescriptor,
        WrapperKind::ServiceDescriptor,
        WrapperKind::Message,
        WrapperKind::Arena,
    ];

    /// The unqualified class name the host sees.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::ByNameMap => "ByNameMap",
            Self::ByNumberMap => "ByNumberMap",
            Self::GenericSequence => "GenericSequence",
            Self::DescriptorPool => "DescriptorPool",
            Self::Descriptor => "Descriptor",
            Self::EnumDescriptor => "EnumDescriptor",
            Self::EnumValueDescriptor => "EnumValueDescriptor",
            Self::FieldDescriptor => "FieldDescriptor",
            Self::FileDescriptor => "FileDescriptor",
            Self::MethodDescriptor => "MethodDescriptor",
            Self::OneofDescriptor => "OneofDescriptor",
            Self::ServiceDescriptor => "ServiceDescriptor",
            Self::Message => "Message",
            Self::Arena => "Arena",
        }
    }

    /// The registration group this kind belongs to.
    pub fn group(self) -> KindGroup {
        match self {
            Self::ByNameMap | Self::ByNumberMap | Self::GenericSequence => KindGroup::Containers,
            Self::DescriptorPool => KindGroup::Pool,
            Self::Descriptor
            | Self::EnumDescriptor
            | Self::EnumValueDescriptor
            | Self::FieldDescriptor
            | Self::FileDescriptor
            | Self::MethodDescriptor
            | Self::OneofDescriptor
            | Self::ServiceDescriptor => KindGroup::Descriptors,
            Self::Message => KindGroup::Messages,
            Self::Arena => KindGroup::Arena,
        }
    }

    /// Whether instances may only be produced by the cache/factory path.
    ///
    /// Descriptors and containers always view memory owned by a pool, so
    /// the host must never construct them directly.
    pub fn is_factory_only(self) -> bool {
        matches!(self.group(), KindGroup::Containers | KindGroup::Descriptors)
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}
