//! Type key normalization.
//!
//! A `TypeKey` is the stable, comparable identity the binding table and the
//! singleton cache are keyed by. Plain Rust types map to `Class` or
//! `Primitive` keys through their `TypeId`; optional, union, alias and
//! generic shapes are addressed structurally because Rust has no runtime
//! expression for them.

use std::any::TypeId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A concrete Rust type, identified by `TypeId`.
    Class { id: TypeId, name: &'static str },
    /// A built-in scalar. Never bindable directly; only reachable through
    /// literal overrides or type-pins on a consumer's rule.
    Primitive { id: TypeId, name: &'static str },
    /// Optional-of-X. Not silently unwrapped: resolving it with no explicit
    /// binding always fails.
    Optional(Box<TypeKey>),
    /// Union of members, canonicalized (flattened, deduplicated, sorted) so
    /// member order does not matter. Not silently unwrapped.
    Union(Vec<TypeKey>),
    /// A named alias over another shape. Resolves structurally to the
    /// wrapped shape for construction, but binding the alias and binding the
    /// underlying shape are independent configuration acts.
    Alias { name: String, target: Box<TypeKey> },
    /// The bare, unparameterized form of a generic type. A valid key in its
    /// own right, never satisfied by any parameterization.
    GenericBase { name: String },
    /// A concrete parameterization of a generic base. Distinct
    /// parameterizations are distinct keys.
    Parameterized {
        base: Box<TypeKey>,
        params: Vec<TypeKey>,
    },
}

impl TypeKey {
    /// Normalizes a plain Rust type into its canonical key.
    pub fn of<T: 'static>() -> Self {
        let id = TypeId::of::<T>();
        match primitive_name(id) {
            Some(name) => TypeKey::Primitive { id, name },
            None => TypeKey::Class {
                id,
                name: std::any::type_name::<T>(),
            },
        }
    }

    pub fn optional(inner: TypeKey) -> Self {
        TypeKey::Optional(Box::new(inner))
    }

    /// Builds a canonical union key. Nested unions are flattened, duplicate
    /// members removed and the remainder sorted, so `union([A, B])` equals
    /// `union([B, A])`. A single-member union collapses to the member.
    pub fn union(members: Vec<TypeKey>) -> Self {
        let mut flat: Vec<TypeKey> = Vec::with_capacity(members.len());
        for member in members {
            match member {
                TypeKey::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        flat.dedup();
        if flat.len() == 1 {
            return flat.into_iter().next().unwrap_or(TypeKey::Union(Vec::new()));
        }
        TypeKey::Union(flat)
    }

    pub fn alias(name: impl Into<String>, target: TypeKey) -> Self {
        TypeKey::Alias {
            name: name.into(),
            target: Box::new(target),
        }
    }

    pub fn generic_base(name: impl Into<String>) -> Self {
        TypeKey::GenericBase { name: name.into() }
    }

    pub fn parameterized(base: TypeKey, params: Vec<TypeKey>) -> Self {
        TypeKey::Parameterized {
            base: Box::new(base),
            params,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeKey::Primitive { .. })
    }

    /// True for shapes the engine refuses to auto-construct because it would
    /// have to guess a member: optional and union keys.
    pub fn is_guessable_shape(&self) -> bool {
        matches!(self, TypeKey::Optional(_) | TypeKey::Union(_))
    }

    /// Unwraps alias layers down to the shape an auto-construction would
    /// actually have to build.
    pub(crate) fn structural_target(&self) -> &TypeKey {
        match self {
            TypeKey::Alias { target, .. } => target.structural_target(),
            other => other,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Class { name, .. } => write!(f, "{}", name),
            TypeKey::Primitive { name, .. } => write!(f, "{}", name),
            TypeKey::Optional(inner) => write!(f, "Optional<{}>", inner),
            TypeKey::Union(members) => {
                let joined: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "Union<{}>", joined.join(" | "))
            }
            TypeKey::Alias { name, .. } => write!(f, "{}", name),
            TypeKey::GenericBase { name } => write!(f, "{}", name),
            TypeKey::Parameterized { base, params } => {
                let joined: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                write!(f, "{}<{}>", base, joined.join(", "))
            }
        }
    }
}

fn primitive_name(id: TypeId) -> Option<&'static str> {
    if id == TypeId::of::<String>() {
        return Some("String");
    }
    if id == TypeId::of::<&'static str>() {
        return Some("&str");
    }
    if id == TypeId::of::<bool>() {
        return Some("bool");
    }
    if id == TypeId::of::<char>() {
        return Some("char");
    }
    if id == TypeId::of::<i8>() {
        return Some("i8");
    }
    if id == TypeId::of::<i16>() {
        return Some("i16");
    }
    if id == TypeId::of::<i32>() {
        return Some("i32");
    }
    if id == TypeId::of::<i64>() {
        return Some("i64");
    }
    if id == TypeId::of::<i128>() {
        return Some("i128");
    }
    if id == TypeId::of::<isize>() {
        return Some("isize");
    }
    if id == TypeId::of::<u8>() {
        return Some("u8");
    }
    if id == TypeId::of::<u16>() {
        return Some("u16");
    }
    if id == TypeId::of::<u32>() {
        return Some("u32");
    }
    if id == TypeId::of::<u64>() {
        return Some("u64");
    }
    if id == TypeId::of::<u128>() {
        return Some("u128");
    }
    if id == TypeId::of::<usize>() {
        return Some("usize");
    }
    if id == TypeId::of::<f32>() {
        return Some("f32");
    }
    if id == TypeId::of::<f64>() {
        return Some("f64");
    }
    if id == TypeId::of::<Vec<u8>>() {
        return Some("Vec<u8>");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    struct Other;

    #[test]
    fn test_plain_class_key() {
        let key = TypeKey::of::<Plain>();
        assert!(!key.is_primitive());
        assert_eq!(key, TypeKey::of::<Plain>());
        assert_ne!(key, TypeKey::of::<Other>());
    }

    #[test]
    fn test_primitive_detection() {
        assert!(TypeKey::of::<String>().is_primitive());
        assert!(TypeKey::of::<&'static str>().is_primitive());
        assert!(TypeKey::of::<u32>().is_primitive());
        assert!(TypeKey::of::<f64>().is_primitive());
        assert!(TypeKey::of::<bool>().is_primitive());
        assert!(TypeKey::of::<Vec<u8>>().is_primitive());
        assert!(!TypeKey::of::<Plain>().is_primitive());
        assert!(!TypeKey::of::<Vec<u32>>().is_primitive());
    }

    #[test]
    fn test_optional_is_distinct_from_member() {
        let member = TypeKey::of::<Plain>();
        let optional = TypeKey::optional(member.clone());
        assert_ne!(optional, member);
        assert!(optional.is_guessable_shape());
        assert!(!member.is_guessable_shape());
    }

    #[test]
    fn test_union_canonical_order() {
        let a = TypeKey::of::<Plain>();
        let b = TypeKey::of::<Other>();
        assert_eq!(
            TypeKey::union(vec![a.clone(), b.clone()]),
            TypeKey::union(vec![b.clone(), a.clone()])
        );
    }

    #[test]
    fn test_union_flattens_and_dedupes() {
        let a = TypeKey::of::<Plain>();
        let b = TypeKey::of::<Other>();
        let nested = TypeKey::union(vec![a.clone(), TypeKey::union(vec![b.clone(), a.clone()])]);
        assert_eq!(nested, TypeKey::union(vec![a.clone(), b.clone()]));
    }

    #[test]
    fn test_single_member_union_collapses() {
        let a = TypeKey::of::<Plain>();
        assert_eq!(TypeKey::union(vec![a.clone(), a.clone()]), a);
    }

    #[test]
    fn test_alias_is_distinct_but_structurally_transparent() {
        let target = TypeKey::of::<Plain>();
        let alias = TypeKey::alias("PlainAlias", target.clone());
        assert_ne!(alias, target);
        assert_eq!(alias.structural_target(), &target);

        let double = TypeKey::alias("Outer", alias);
        assert_eq!(double.structural_target(), &target);
    }

    #[test]
    fn test_parameterized_keys_are_independent() {
        let base = TypeKey::generic_base("Container");
        let ints = TypeKey::parameterized(base.clone(), vec![TypeKey::of::<i32>()]);
        let texts = TypeKey::parameterized(base.clone(), vec![TypeKey::of::<String>()]);
        assert_ne!(base, ints);
        assert_ne!(ints, texts);
        assert_eq!(
            ints,
            TypeKey::parameterized(base, vec![TypeKey::of::<i32>()])
        );
    }

    #[test]
    fn test_monomorphized_generics_have_distinct_keys() {
        assert_ne!(TypeKey::of::<Vec<u32>>(), TypeKey::of::<Vec<i64>>());
    }

    #[test]
    fn test_display() {
        let a = TypeKey::of::<u32>();
        assert_eq!(a.to_string(), "u32");
        assert_eq!(TypeKey::optional(a.clone()).to_string(), "Optional<u32>");
        assert_eq!(
            TypeKey::parameterized(TypeKey::generic_base("Container"), vec![a]).to_string(),
            "Container<u32>"
        );
    }
}
