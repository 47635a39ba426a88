//! Type, module, and member references.
//!
//! These are pure value descriptors. Two references compare equal when they
//! name the same type shape, regardless of where or when they were produced,
//! so catalogs built in different processes remain comparable.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identity of the module (assembly, library) a type is defined in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    /// Simple module name.
    pub name: String,
    /// Module version, if versioned.
    pub version: Option<String>,
    /// Public key token of a strong-named module.
    pub public_key_token: Option<String>,
}

impl ModuleId {
    /// Create an unversioned module identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            public_key_token: None,
        }
    }

    /// Set the module version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the public key token.
    pub fn with_public_key_token(mut self, token: impl Into<String>) -> Self {
        self.public_key_token = Some(token.into());
        self
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, ", Version={version}")?;
        }
        if let Some(token) = &self.public_key_token {
            write!(f, ", PublicKeyToken={token}")?;
        }
        Ok(())
    }
}

/// A named type, possibly a generic type definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    /// Module that defines the type.
    pub module: ModuleId,
    /// Fully qualified name, including any arity suffix (`Ns.IHandler`1`).
    pub full_name: String,
    /// Number of generic type parameters (0 for non-generic types).
    pub arity: usize,
}

impl NamedType {
    /// Create a named type.
    pub fn new(module: ModuleId, full_name: impl Into<String>, arity: usize) -> Self {
        Self {
            module,
            full_name: full_name.into(),
            arity,
        }
    }

    /// Name without the trailing arity marker.
    fn base_name(&self) -> &str {
        match self.full_name.rfind('`') {
            Some(pos) if self.full_name[pos + 1..].bytes().all(|b| b.is_ascii_digit()) => {
                &self.full_name[..pos]
            }
            _ => &self.full_name,
        }
    }
}

/// Structural description of a type.
///
/// Generic type definitions are `Named` with a non-zero arity; an
/// instantiation (open or closed) is `Generic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A non-generic type or a generic type definition.
    Named(NamedType),
    /// A generic type instantiated with type arguments.
    Generic {
        /// The generic type definition.
        definition: NamedType,
        /// Type arguments, positionally matching the definition's parameters.
        arguments: Vec<TypeRef>,
    },
    /// A generic type parameter placeholder.
    Parameter {
        /// Zero-based position in the declaring generic's parameter list.
        position: usize,
        /// Declared parameter name (`T`).
        name: String,
    },
    /// An array of some element type.
    Array {
        /// Element type.
        element: Box<TypeRef>,
        /// Number of dimensions.
        rank: u8,
    },
}

impl TypeRef {
    /// Create a non-generic named type.
    pub fn named(module: ModuleId, full_name: impl Into<String>) -> Self {
        TypeRef::Named(NamedType::new(module, full_name, 0))
    }

    /// Create a generic type definition (`IHandler<>`).
    pub fn generic_definition(module: ModuleId, full_name: impl Into<String>, arity: usize) -> Self {
        TypeRef::Named(NamedType::new(module, full_name, arity))
    }

    /// Instantiate a generic type with the given arguments.
    pub fn generic(
        module: ModuleId,
        full_name: impl Into<String>,
        arguments: impl IntoIterator<Item = TypeRef>,
    ) -> Self {
        let arguments: Vec<TypeRef> = arguments.into_iter().collect();
        TypeRef::Generic {
            definition: NamedType::new(module, full_name, arguments.len()),
            arguments,
        }
    }

    /// Create a type parameter placeholder.
    pub fn parameter(position: usize, name: impl Into<String>) -> Self {
        TypeRef::Parameter {
            position,
            name: name.into(),
        }
    }

    /// Create a single-dimension array type.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    /// Canonical textual identity of this type.
    ///
    /// Generic parameters render as positional `{n}` placeholders, so the
    /// identity of an open type doubles as a format string for its closures.
    pub fn identity(&self) -> String {
        self.to_string()
    }

    /// Number of type arguments needed to close this type.
    ///
    /// A generic definition needs its declared arity; anything else needs one
    /// more than the highest parameter position it mentions.
    pub fn generic_arity(&self) -> usize {
        match self {
            TypeRef::Named(named) => named.arity,
            _ => self.max_parameter_position().map_or(0, |p| p + 1),
        }
    }

    /// Whether this type still has unbound type parameters.
    pub fn is_open(&self) -> bool {
        self.generic_arity() > 0
    }

    fn max_parameter_position(&self) -> Option<usize> {
        match self {
            TypeRef::Named(_) => None,
            TypeRef::Parameter { position, .. } => Some(*position),
            TypeRef::Generic { arguments, .. } => arguments
                .iter()
                .filter_map(TypeRef::max_parameter_position)
                .max(),
            TypeRef::Array { element, .. } => element.max_parameter_position(),
        }
    }

    /// Number of type arguments needed to bind every parameter placeholder.
    ///
    /// Unlike [`generic_arity`](Self::generic_arity), generic definitions
    /// do not count; only `{n}` placeholders do.
    pub fn parameter_count(&self) -> usize {
        self.max_parameter_position().map_or(0, |p| p + 1)
    }

    /// Close this type over `arguments`.
    ///
    /// A generic definition whose arity matches becomes an instantiation.
    /// Anything else has its parameter placeholders substituted.
    pub fn close(&self, arguments: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Named(named) if named.arity > 0 && named.arity == arguments.len() => {
                TypeRef::Generic {
                    definition: named.clone(),
                    arguments: arguments.to_vec(),
                }
            }
            _ => self.substitute(arguments),
        }
    }

    /// Replace parameter placeholders positionally.
    ///
    /// Placeholders out of range and generic definitions are left as they are.
    pub fn substitute(&self, arguments: &[TypeRef]) -> TypeRef {
        match self {
            TypeRef::Named(_) => self.clone(),
            TypeRef::Parameter { position, .. } => match arguments.get(*position) {
                Some(argument) => argument.clone(),
                None => self.clone(),
            },
            TypeRef::Generic {
                definition,
                arguments: own,
            } => TypeRef::Generic {
                definition: definition.clone(),
                arguments: own.iter().map(|a| a.substitute(arguments)).collect(),
            },
            TypeRef::Array { element, rank } => TypeRef::Array {
                element: Box::new(element.substitute(arguments)),
                rank: *rank,
            },
        }
    }

    /// Add every module this type refers to.
    pub fn collect_modules(&self, modules: &mut HashSet<ModuleId>) {
        match self {
            TypeRef::Named(named) => {
                modules.insert(named.module.clone());
            }
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                modules.insert(definition.module.clone());
                for argument in arguments {
                    argument.collect_modules(modules);
                }
            }
            TypeRef::Parameter { .. } => {}
            TypeRef::Array { element, .. } => element.collect_modules(modules),
        }
    }

    /// Module of the outermost named type, if any.
    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            TypeRef::Named(named) => Some(&named.module),
            TypeRef::Generic { definition, .. } => Some(&definition.module),
            TypeRef::Parameter { .. } => None,
            TypeRef::Array { element, .. } => element.module(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(named) if named.arity == 0 => f.write_str(&named.full_name),
            TypeRef::Named(named) => {
                write!(f, "{}(", named.base_name())?;
                for position in 0..named.arity {
                    if position > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{{{position}}}")?;
                }
                f.write_str(")")
            }
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                write!(f, "{}(", definition.base_name())?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(")")
            }
            TypeRef::Parameter { position, .. } => write!(f, "{{{position}}}"),
            TypeRef::Array { element, rank } => {
                write!(f, "{element}[")?;
                for _ in 1..*rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Kind of member that produces an export or receives an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// A field.
    Field,
    /// A property.
    Property,
    /// A method (exported as a delegate).
    Method,
    /// A constructor parameter.
    Constructor,
}

/// Reference to a member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    /// Type that declares the member.
    pub declaring_type: TypeRef,
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
}

impl MemberRef {
    /// Create a member reference.
    pub fn new(declaring_type: TypeRef, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            kind,
        }
    }

    /// Reference a property.
    pub fn property(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self::new(declaring_type, name, MemberKind::Property)
    }

    /// Reference a field.
    pub fn field(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self::new(declaring_type, name, MemberKind::Field)
    }

    /// Reference a method.
    pub fn method(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self::new(declaring_type, name, MemberKind::Method)
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}
