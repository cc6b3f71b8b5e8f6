use thiserror::Error;

/// **INJECTOR ERROR KINDS**
///
/// Three kinds, no silent fallback between them. Errors are `Clone` so that
/// concurrent waiters on a failed construction can observe the builder's
/// error without re-running it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InjectorError {
    #[error("CONFIGURATION ERROR: {code} - {message}")]
    Configuration { code: String, message: String },

    #[error("INSTANTIATION ERROR: {code} - {message}")]
    Instantiation { code: String, message: String },

    #[error("CIRCULAR DEPENDENCY ERROR: {message}")]
    CircularDependency { message: String, cycle: Vec<String> },
}

impl InjectorError {
    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        InjectorError::Configuration {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn instantiation(code: &str, message: impl Into<String>) -> Self {
        InjectorError::Instantiation {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Builds a circular-dependency error from the offending call chain,
    /// first re-entered key last.
    pub fn circular(cycle: Vec<String>) -> Self {
        InjectorError::CircularDependency {
            message: cycle.join(" -> "),
            cycle,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, InjectorError::Configuration { .. })
    }

    pub fn is_instantiation(&self) -> bool {
        matches!(self, InjectorError::Instantiation { .. })
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, InjectorError::CircularDependency { .. })
    }

    pub fn code(&self) -> &str {
        match self {
            InjectorError::Configuration { code, .. } => code,
            InjectorError::Instantiation { code, .. } => code,
            InjectorError::CircularDependency { .. } => error_codes::CIRCULAR_DEPENDENCY,
        }
    }
}

/// **RESOLUTION ERROR CODES**
///
/// **MANDATE**: Use these standardized error codes for consistent error reporting.
pub mod error_codes {
    pub const PRIMITIVE_BINDING: &str = "INJECTOR_CONFIGURATION_PRIMITIVE_BINDING";
    pub const UNRESOLVABLE_SHAPE: &str = "INJECTOR_CONFIGURATION_UNRESOLVABLE_SHAPE";
    pub const NOT_CONSTRUCTIBLE: &str = "INJECTOR_CONFIGURATION_NOT_CONSTRUCTIBLE";
    pub const STRICT_POLICY_MISS: &str = "INJECTOR_CONFIGURATION_STRICT_POLICY_MISS";
    pub const MISSING_VALUE: &str = "INJECTOR_INSTANTIATION_MISSING_VALUE";
    pub const CONSTRUCTOR_FAILED: &str = "INJECTOR_INSTANTIATION_CONSTRUCTOR_FAILED";
    pub const TYPE_MISMATCH: &str = "INJECTOR_INSTANTIATION_TYPE_MISMATCH";
    pub const LOCK_POISONED: &str = "INJECTOR_INSTANTIATION_LOCK_POISONED";
    pub const CIRCULAR_DEPENDENCY: &str = "INJECTOR_CIRCULAR_DEPENDENCY";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_prefixes() {
        let err = InjectorError::configuration(error_codes::PRIMITIVE_BINDING, "bad bind");
        assert!(err.to_string().starts_with("CONFIGURATION ERROR:"));

        let err = InjectorError::instantiation(error_codes::MISSING_VALUE, "no value");
        assert!(err.to_string().starts_with("INSTANTIATION ERROR:"));

        let err = InjectorError::circular(vec!["A".to_string(), "B".to_string(), "A".to_string()]);
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn test_error_kind_predicates() {
        let err = InjectorError::configuration(error_codes::NOT_CONSTRUCTIBLE, "x");
        assert!(err.is_configuration());
        assert!(!err.is_instantiation());
        assert!(!err.is_circular());
        assert_eq!(err.code(), error_codes::NOT_CONSTRUCTIBLE);
    }

    #[test]
    fn test_circular_error_carries_cycle() {
        let cycle = vec!["A".to_string(), "B".to_string(), "C".to_string(), "A".to_string()];
        match InjectorError::circular(cycle.clone()) {
            InjectorError::CircularDependency { cycle: carried, .. } => {
                assert_eq!(carried, cycle);
            }
            _ => panic!("Wrong error type"),
        }
    }
}
