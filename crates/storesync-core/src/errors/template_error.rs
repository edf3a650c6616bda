/// Template parsing and rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template syntax error: {message}")]
    Syntax { message: String },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },
}
