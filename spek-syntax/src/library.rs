//! Library Model
//!
//! Declarations that live outside the analysed file (the test framework's
//! API, most importantly) are described declaratively so the symbol index
//! can resolve against them without a classpath. The built-in model covers
//! the Spek 1.x API; other models can be loaded from JSON.

use crate::error::Result;
use crate::ir::TypeRef;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A type declared by a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryType {
    pub fq_name: String,
    /// Fully qualified direct supertypes
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub is_abstract: bool,
    /// Modules the type is visible from; empty means everywhere
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
}

impl LibraryType {
    pub fn new(fq_name: impl Into<String>) -> Self {
        Self {
            fq_name: fq_name.into(),
            supertypes: Vec::new(),
            is_abstract: false,
            modules: Vec::new(),
        }
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.modules.push(module.into());
        self
    }
}

/// A top-level function declared by a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFunction {
    pub fq_name: String,
    /// Extension receiver as declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<TypeRef>,
}

impl LibraryFunction {
    pub fn new(fq_name: impl Into<String>) -> Self {
        Self {
            fq_name: fq_name.into(),
            receiver: None,
        }
    }

    /// Extension function on the user type `receiver`
    pub fn extension(receiver: impl Into<String>, fq_name: impl Into<String>) -> Self {
        Self {
            fq_name: fq_name.into(),
            receiver: Some(TypeRef::User(receiver.into())),
        }
    }

    pub fn name(&self) -> &str {
        self.fq_name.rsplit('.').next().unwrap_or(&self.fq_name)
    }

    pub fn package(&self) -> &str {
        self.fq_name
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or("")
    }
}

/// External declarations available to a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryModel {
    #[serde(default)]
    pub types: Vec<LibraryType>,
    #[serde(default)]
    pub functions: Vec<LibraryFunction>,
}

const SPEK_API: &str = "org.jetbrains.spek.api";
const SPEK_DSL: &str = "org.jetbrains.spek.api.dsl";

impl LibraryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Spek 1.x API
    pub fn spek_api() -> Self {
        let dsl = |name: &str| format!("{SPEK_DSL}.{name}");

        let types = vec![
            LibraryType::new(format!("{SPEK_API}.Spek")).abstract_type(),
            LibraryType::new("org.jetbrains.spek.subject.SubjectSpek")
                .abstract_type()
                .extends(format!("{SPEK_API}.Spek")),
            LibraryType::new(dsl("Dsl")).abstract_type(),
            LibraryType::new(dsl("TestContainer")).abstract_type(),
            LibraryType::new(dsl("TestBody")).abstract_type(),
            LibraryType::new(dsl("ActionBody"))
                .abstract_type()
                .extends(dsl("TestContainer")),
            LibraryType::new(dsl("SpecBody"))
                .abstract_type()
                .extends(dsl("TestContainer")),
            LibraryType::new(dsl("Spec"))
                .abstract_type()
                .extends(dsl("SpecBody")),
            LibraryType::new("org.junit.runner.RunWith").abstract_type(),
        ];

        let mut functions = Vec::new();
        for name in ["describe", "context", "given", "on"] {
            functions.push(LibraryFunction::extension("SpecBody", dsl(name)));
            functions.push(LibraryFunction::extension("SpecBody", dsl(&format!("x{name}"))));
        }
        functions.push(LibraryFunction::extension("TestContainer", dsl("it")));
        functions.push(LibraryFunction::extension("TestContainer", dsl("xit")));

        Self { types, functions }
    }

    /// Parse a model from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a model from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add the declarations of `other`
    pub fn merge(&mut self, other: LibraryModel) {
        self.types.extend(other.types);
        self.functions.extend(other.functions);
    }

    pub fn find_type(&self, fq_name: &str) -> Option<&LibraryType> {
        self.types.iter().find(|t| t.fq_name == fq_name)
    }

    /// Functions with simple name `name`, in declaration order
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LibraryFunction> {
        self.functions.iter().filter(move |f| f.name() == name)
    }
}
