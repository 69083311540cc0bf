use crate::error::ModelError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

bitflags! {
    /// Visibility and qualifier bits of a declaration.
    ///
    /// The empty set means package-private ("default") visibility. The
    /// visibility bits are mutually exclusive, the qualifiers are not.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
    }
}

impl Modifiers {
    pub const DEFAULT: Modifiers = Modifiers::empty();
    pub const VISIBILITY: Modifiers = Modifiers::PUBLIC
        .union(Modifiers::PRIVATE)
        .union(Modifiers::PROTECTED);

    /// Order in which modifiers are written into source text.
    const RENDER_ORDER: [(Modifiers, &'static str); 10] = [
        (Modifiers::PUBLIC, "public"),
        (Modifiers::PROTECTED, "protected"),
        (Modifiers::PRIVATE, "private"),
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::STATIC, "static"),
        (Modifiers::FINAL, "final"),
        (Modifiers::TRANSIENT, "transient"),
        (Modifiers::VOLATILE, "volatile"),
        (Modifiers::SYNCHRONIZED, "synchronized"),
        (Modifiers::NATIVE, "native"),
    ];

    /// Builds a set from raw bits. Unknown bits are kept so that legality
    /// checks can report them.
    #[must_use]
    pub const fn with_modifiers(mask: u16) -> Self {
        Modifiers::from_bits_retain(mask)
    }

    #[must_use]
    pub fn add_modifier(self, bit: Modifiers) -> Self {
        self | bit
    }

    #[must_use]
    pub fn remove_modifier(self, bit: Modifiers) -> Self {
        self - bit
    }

    #[must_use]
    pub const fn modifiers(self) -> u16 {
        self.bits()
    }

    /// Number of visibility bits set; a legal set has at most one.
    #[must_use]
    pub fn visibility_count(self) -> u32 {
        (self & Modifiers::VISIBILITY).bits().count_ones()
    }

    #[must_use]
    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }

    #[must_use]
    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    /// Renders the modifiers as keywords followed by a single space, or the
    /// empty string when no modifier is set.
    #[must_use]
    pub fn to_prefix(self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{self} ")
        }
    }
}

impl Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (bit, keyword) in Modifiers::RENDER_ORDER {
            if self.contains(bit) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{keyword}")?;
                first = false;
            }
        }
        let unknown = self.bits() & !Modifiers::all().bits();
        if unknown != 0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "0x{unknown:04x}")?;
        }
        Ok(())
    }
}

/// The kinds of construct a modifier set can be attached to, each with its
/// own legality mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Field,
    Method,
    Constructor,
    Initializer,
    StaticInitializer,
    /// A class owned by a compilation unit (or not yet owned).
    Class,
    /// An interface owned by a compilation unit (or not yet owned).
    Interface,
    NestedClass,
    NestedInterface,
    InterfaceField,
    InterfaceMethod,
    /// A class declared inside an interface.
    InterfaceMemberClass,
    /// An interface declared inside an interface.
    InterfaceMemberInterface,
}

impl ConstructKind {
    #[must_use]
    pub const fn valid_modifiers(self) -> Modifiers {
        match self {
            ConstructKind::Field => Modifiers::VISIBILITY
                .union(Modifiers::STATIC)
                .union(Modifiers::FINAL)
                .union(Modifiers::TRANSIENT)
                .union(Modifiers::VOLATILE),
            ConstructKind::Method => Modifiers::VISIBILITY
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::STATIC)
                .union(Modifiers::FINAL)
                .union(Modifiers::SYNCHRONIZED)
                .union(Modifiers::NATIVE),
            ConstructKind::Constructor => Modifiers::VISIBILITY,
            ConstructKind::Initializer => Modifiers::empty(),
            ConstructKind::StaticInitializer => Modifiers::STATIC,
            ConstructKind::Class => Modifiers::PUBLIC
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::FINAL),
            ConstructKind::Interface => Modifiers::PUBLIC.union(Modifiers::ABSTRACT),
            ConstructKind::NestedClass => Modifiers::VISIBILITY
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::STATIC)
                .union(Modifiers::FINAL),
            ConstructKind::NestedInterface => Modifiers::VISIBILITY
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::STATIC),
            ConstructKind::InterfaceField => Modifiers::PUBLIC
                .union(Modifiers::STATIC)
                .union(Modifiers::FINAL),
            ConstructKind::InterfaceMethod => Modifiers::PUBLIC.union(Modifiers::ABSTRACT),
            ConstructKind::InterfaceMemberClass => Modifiers::PUBLIC
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::STATIC)
                .union(Modifiers::FINAL),
            ConstructKind::InterfaceMemberInterface => Modifiers::PUBLIC
                .union(Modifiers::ABSTRACT)
                .union(Modifiers::STATIC),
        }
    }

    #[must_use]
    pub fn is_valid_modifier(self, modifiers: Modifiers) -> bool {
        (modifiers.bits() & !self.valid_modifiers().bits()) == 0
            && modifiers.visibility_count() <= 1
    }

    /// Fails with `InvalidModifier` when `modifiers` is not legal here.
    pub fn check(self, modifiers: Modifiers) -> Result<(), ModelError> {
        if self.is_valid_modifier(modifiers) {
            return Ok(());
        }
        let outside = Modifiers::from_bits_retain(
            modifiers.bits() & !self.valid_modifiers().bits(),
        );
        let offending = if outside.is_empty() {
            modifiers & Modifiers::VISIBILITY
        } else {
            outside
        };
        Err(ModelError::InvalidModifier {
            offending: offending.to_string(),
            construct: self.to_string(),
        })
    }
}

impl Display for ConstructKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstructKind::Field => "field",
            ConstructKind::Method => "method",
            ConstructKind::Constructor => "constructor",
            ConstructKind::Initializer => "initializer",
            ConstructKind::StaticInitializer => "static initializer",
            ConstructKind::Class => "top-level class",
            ConstructKind::Interface => "top-level interface",
            ConstructKind::NestedClass => "nested class",
            ConstructKind::NestedInterface => "nested interface",
            ConstructKind::InterfaceField => "interface field",
            ConstructKind::InterfaceMethod => "interface method",
            ConstructKind::InterfaceMemberClass => "class in an interface",
            ConstructKind::InterfaceMemberInterface => "interface in an interface",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_operations_do_not_validate() {
        let m = Modifiers::with_modifiers(0)
            .add_modifier(Modifiers::PUBLIC)
            .add_modifier(Modifiers::PRIVATE)
            .add_modifier(Modifiers::NATIVE);
        assert_eq!(m.modifiers(), 0x0001 | 0x0002 | 0x0100);
        let m = m.remove_modifier(Modifiers::PRIVATE);
        assert_eq!(m, Modifiers::PUBLIC | Modifiers::NATIVE);
    }

    #[test]
    fn test_render_order() {
        let m = Modifiers::FINAL | Modifiers::STATIC | Modifiers::PRIVATE;
        assert_eq!(m.to_string(), "private static final");
        assert_eq!(Modifiers::DEFAULT.to_prefix(), "");
        assert_eq!(Modifiers::PUBLIC.to_prefix(), "public ");
    }

    #[test]
    fn test_unknown_bits_are_reported() {
        let m = Modifiers::with_modifiers(0x0200 | 0x0001);
        assert_eq!(m.to_string(), "public 0x0200");
        assert!(!ConstructKind::Method.is_valid_modifier(m));
    }

    #[test]
    fn test_visibility_is_exclusive() {
        let err = ConstructKind::Field
            .check(Modifiers::PUBLIC | Modifiers::PRIVATE)
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidModifier {
                offending: "public private".to_string(),
                construct: "field".to_string(),
            }
        );
    }

    #[test]
    fn test_initializers_accept_only_fixed_sets() {
        assert!(ConstructKind::Initializer.is_valid_modifier(Modifiers::DEFAULT));
        assert!(!ConstructKind::Initializer.is_valid_modifier(Modifiers::STATIC));
        assert!(ConstructKind::StaticInitializer.is_valid_modifier(Modifiers::STATIC));
    }
}
