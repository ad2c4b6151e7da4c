//! Parsing of `#[gencfg("...")]` tag lists.

use crate::SanitizeError;

/// One operation named in a tag list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    PathClean,
    PathAbs,
    PathToSlash,
    AssureDirExists,
    AssureDirExistsForFile,
    /// `test_call=NAME`; `None` when the name is missing
    TestCall(Option<String>),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::PathClean => "path_clean",
            Operation::PathAbs => "path_abs",
            Operation::PathToSlash => "path_toslash",
            Operation::AssureDirExists => "assure_dir_exists",
            Operation::AssureDirExistsForFile => "assure_dir_exists_for_file",
            Operation::TestCall(_) => "test_call",
        }
    }
}

/// Parsed comma-separated list of `name[=argument]` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    operations: Vec<Operation>,
}

impl Directive {
    /// Parse a tag list. Empty tokens are skipped.
    ///
    /// ```rust
    /// use gencfg::sanitize::{Directive, Operation};
    ///
    /// let directive = Directive::parse("path_clean,,path_abs").unwrap();
    /// assert_eq!(directive.operations(), [Operation::PathClean, Operation::PathAbs]);
    /// ```
    pub fn parse(tags: &str) -> Result<Directive, SanitizeError> {
        let operations = tags
            .split(',')
            .filter(|token| !token.is_empty())
            .map(parse_token)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Directive { operations })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn parse_token(token: &str) -> Result<Operation, SanitizeError> {
    let (name, argument) = match token.split_once('=') {
        Some((name, argument)) => (name, Some(argument)),
        None => (token, None),
    };
    let operation = match name {
        "path_clean" => Operation::PathClean,
        "path_abs" => Operation::PathAbs,
        "path_toslash" => Operation::PathToSlash,
        "assure_dir_exists" => Operation::AssureDirExists,
        "assure_dir_exists_for_file" => Operation::AssureDirExistsForFile,
        "test_call" => Operation::TestCall(
            argument
                .filter(|argument| !argument.is_empty())
                .map(str::to_string),
        ),
        _ => return Err(SanitizeError::UnknownTag(token.to_string())),
    };
    Ok(operation)
}
