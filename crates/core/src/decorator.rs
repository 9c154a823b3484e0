//! Argument checks shared by the decorator-driven analyzers.

use crate::error::AnalyzerError;
use crate::source::{Annotation, AnnotationArg};

/// Expect `dec` to have at most one argument, a string literal.
///
/// Returns `None` when the decorator has no argument.
pub fn expect_single_str_lit(dec: &Annotation) -> Result<Option<&str>, AnalyzerError> {
    match dec.args.as_slice() {
        [] => Ok(None),
        [AnnotationArg::Literal(value)] => Ok(Some(value.as_str())),
        [AnnotationArg::Other(text)] => Err(AnalyzerError::MalformedDecorator {
            decorator: dec.name.clone(),
            reason: format!("the argument provided to the decorator is not a string literal:\n>>> {text}"),
        }),
        args => Err(AnalyzerError::MalformedDecorator {
            decorator: dec.name.clone(),
            reason: format!("multiple ({}) arguments were provided to the decorator", args.len()),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn annotation(args: Vec<AnnotationArg>) -> Annotation {
        Annotation {
            name: "Query".to_string(),
            args,
        }
    }

    #[test]
    fn accepts_zero_or_one_literal() {
        assert_eq!(expect_single_str_lit(&annotation(vec![])).unwrap(), None);
        let dec = annotation(vec![AnnotationArg::Literal("page".to_string())]);
        assert_eq!(expect_single_str_lit(&dec).unwrap(), Some("page"));
    }

    #[test]
    fn rejects_non_literals_and_extra_arguments() {
        let dec = annotation(vec![AnnotationArg::Other("PAGE_KEY".to_string())]);
        let err = expect_single_str_lit(&dec).unwrap_err().to_string();
        assert!(err.contains("not a string literal"));
        assert!(err.contains("PAGE_KEY"));

        let dec = annotation(vec![
            AnnotationArg::Literal("a".to_string()),
            AnnotationArg::Other("new ParseIntPipe()".to_string()),
        ]);
        let err = expect_single_str_lit(&dec).unwrap_err().to_string();
        assert!(err.contains("multiple (2) arguments"));
    }
}
