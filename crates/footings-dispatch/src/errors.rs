use thiserror::Error;

fn tuple(key: &[String]) -> String {
    format!("({})", key.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(", "))
}

/// Fallos al registrar un callable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatcherRegisterError {
    #[error("The parameter [{param}] of dispatcher {dispatcher} was not given a value.")]
    MissingParameter { dispatcher: String, param: String },
    #[error("The value for [{param}] is not a str or a list of str (received {found}).")]
    InvalidValue { dispatcher: String, param: String, found: String },
    #[error("The keys registered on dispatcher {dispatcher} must be an object of parameter values, received {found}.")]
    NotAnObject { dispatcher: String, found: String },
    #[error("The parameter [{param}] is not a parameter of dispatcher {dispatcher}. Declared parameters: [{}].", .declared.join(", "))]
    UnknownParameter { dispatcher: String, param: String, declared: Vec<String> },
}

/// Fallos al resolver una llamada.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatcherKeyError {
    #[error("The key {} does not exist within the registry of dispatcher {dispatcher} and no default.", tuple(.key))]
    Unmatched { dispatcher: String, key: Vec<String> },
    #[error("The dispatch parameter [{param}] of dispatcher {dispatcher} was not passed.")]
    MissingParameter { dispatcher: String, param: String },
    #[error("Dispatcher {dispatcher} expects {expected} key value(s), received {found}.")]
    KeyLength { dispatcher: String, expected: usize, found: usize },
}
