//! Persisted program format.

use crate::prelude::*;
use crate::shared::error::Error;
use crate::bytecode::Bytecode;

/// Source language of a program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "BASIC")]
    Basic,
    C,
    Java,
    Pascal,
    Python,
}

impl Language {
    /// Conventional file extension of the language's source files.
    pub fn extension(self: &Self) -> &'static str {
        match self {
            Language::Basic     => "tgb",
            Language::C         => "tgc",
            Language::Java      => "tgj",
            Language::Pascal    => "tgp",
            Language::Python    => "tgy",
        }
    }
    /// Whether the language writes literal `true` as 1 instead of -1.
    pub fn positive_true(self: &Self) -> bool {
        matches!(self, Language::C | Language::Java | Language::Python)
    }
}

/// A program exchanged between tools: source text, front end diagnostics and the compiled bytecode.
///
/// The bytecode is stored as plain nested integer arrays and can be executed without recompiling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramFile {
    pub language: Language,
    #[serde(default)]
    pub name    : String,
    pub source  : String,
    #[serde(default)]
    pub usage   : serde_json::Value,
    #[serde(default)]
    pub lexemes : serde_json::Value,
    pub pcode   : Bytecode,
}

impl ProgramFile {
    /// Creates a program file without front end diagnostics.
    pub fn new(language: Language, name: &str, source: &str, pcode: Bytecode) -> Self {
        ProgramFile {
            language,
            name    : name.to_string(),
            source  : source.to_string(),
            usage   : serde_json::Value::Array(Vec::new()),
            lexemes : serde_json::Value::Array(Vec::new()),
            pcode,
        }
    }
    /// Serializes the program file to JSON.
    pub fn to_json(self: &Self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
    /// Serializes the program file to indented JSON.
    pub fn to_json_pretty(self: &Self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    /// Loads a program file from JSON. The bytecode is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let file: ProgramFile = serde_json::from_str(json)?;
        if let Err(error) = file.pcode.validate() {
            return Err(Error::InvalidBytecode(error));
        }
        Ok(file)
    }
}
