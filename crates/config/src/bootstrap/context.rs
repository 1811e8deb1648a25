//! Application context, e.g. `Production/Staging`.
//!
//! The first segment is the root context and must be one of `Production`,
//! `Development` or `Testing`. Further segments name sub-contexts.

use std::fmt;
use std::str::FromStr;

use crate::loader::ConfigError;

/// Root of an application context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootContext {
    Production,
    Development,
    Testing,
}

impl RootContext {
    pub fn as_str(self) -> &'static str {
        match self {
            RootContext::Production => "Production",
            RootContext::Development => "Development",
            RootContext::Testing => "Testing",
        }
    }
}

/// A validated application context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationContext {
    context: String,
    root: RootContext,
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self {
            context: RootContext::Production.as_str().to_string(),
            root: RootContext::Production,
        }
    }
}

impl ApplicationContext {
    /// Parse and validate a context string.
    pub fn parse(context: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidContext {
            context: context.to_string(),
            message: message.to_string(),
        };

        let mut segments = context.split('/');
        let root = match segments.next() {
            Some("Production") => RootContext::Production,
            Some("Development") => RootContext::Development,
            Some("Testing") => RootContext::Testing,
            _ => {
                return Err(invalid(
                    "root context must be Production, Development or Testing",
                ));
            }
        };

        if segments.any(|segment| segment.trim().is_empty()) {
            return Err(invalid("sub-context names must not be empty"));
        }

        Ok(Self {
            context: context.to_string(),
            root,
        })
    }

    pub fn root(&self) -> RootContext {
        self.root
    }

    pub fn is_production(&self) -> bool {
        self.root == RootContext::Production
    }

    pub fn is_development(&self) -> bool {
        self.root == RootContext::Development
    }

    pub fn is_testing(&self) -> bool {
        self.root == RootContext::Testing
    }

    /// The enclosing context, e.g. `Production` for `Production/Staging`.
    pub fn parent(&self) -> Option<Self> {
        let (parent, _) = self.context.rsplit_once('/')?;
        Some(Self {
            context: parent.to_string(),
            root: self.root,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.context
    }
}

impl FromStr for ApplicationContext {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.context)
    }
}
