//! Request body of the transactional commit endpoint.

use neoquery_builder::Parameters;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CommitRequest<'a> {
    pub statements: Vec<Statement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Statement<'a> {
    pub statement: &'a str,
    pub parameters: &'a Parameters,
}

impl<'a> CommitRequest<'a> {
    /// A request with exactly one statement.
    pub fn single(statement: &'a str, parameters: &'a Parameters) -> Self {
        Self {
            statements: vec![Statement {
                statement,
                parameters,
            }],
        }
    }
}
