use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum NetdocError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Dialect(#[from] DialectError),
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum DialectError {
    #[error("Unable to determine the vendor dialect")]
    #[diagnostic(
        code(dialect::unknown),
        help("The capture carries no distinguishing vendor tokens. Pass an explicit dialect hint alongside the raw text.")
    )]
    UnknownDialect {
        #[source_code]
        src: NamedSource<String>,
        #[label("No recognizable command verbs, naming directives, or prompt shapes in this capture")]
        span: SourceSpan,
    },
}
