//! CSS Object Model stylesheet (subset of CSSOM §6.1).

use std::fmt;
use std::path::Path;

use crate::config::EnvConfig;
use crate::css::lexer::read_css;
use crate::css::parser::{parse_rule, parse_rule_list, parse_stylesheet, Rule};
use crate::error::{CssError, StylesheetError};

/// Options for [`Stylesheet::with_init`].
#[derive(Debug, Clone, Default)]
pub struct StylesheetInit {
    pub base_url: Option<String>,
    /// An empty title is treated as no title.
    pub title: Option<String>,
    pub disabled: bool,
    pub disallow_modification: bool,
}

#[derive(Debug)]
pub struct Stylesheet {
    href: Option<String>,
    base_url: Option<String>,
    title: Option<String>,
    alternate: bool,
    disabled: bool,
    origin_clean: bool,
    disallow_modification: bool,
    constructed: bool,
    rules: Vec<Rule>,
    errors: Vec<CssError>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    /// An empty constructed stylesheet.
    pub fn new() -> Self {
        Self::with_init(StylesheetInit::default())
    }

    pub fn with_init(init: StylesheetInit) -> Self {
        Self {
            href: None,
            base_url: init.base_url,
            title: init.title.filter(|title| !title.is_empty()),
            alternate: false,
            disabled: init.disabled,
            origin_clean: true,
            disallow_modification: init.disallow_modification,
            constructed: true,
            rules: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn parsed(rules: Vec<Rule>, href: Option<String>, errors: Vec<CssError>) -> Self {
        Self {
            href,
            constructed: false,
            rules,
            errors,
            ..Self::new()
        }
    }

    /// Read and parse a stylesheet file.
    ///
    /// With `strict`, any tokenizer or parser error fails the load; otherwise errors are logged
    /// and kept on the sheet.
    pub fn from_path(path: impl AsRef<Path>, strict: bool) -> Result<Self, CssError> {
        let path = path.as_ref();
        let text = read_css(path)?;
        let href = path.display().to_string();
        let mut sheet = parse_stylesheet(text.as_str(), Some(href.as_str()));

        if let Some(first) = sheet.errors.first() {
            if strict {
                return Err(CssError::Strict {
                    path: path.to_path_buf(),
                    count: sheet.errors.len(),
                    first: first.to_string(),
                });
            }
            tracing::warn!(
                path = %path.display(),
                errors = sheet.errors.len(),
                first = %first,
                "stylesheet loaded with parse errors"
            );
        }
        sheet.href = Some(href);
        Ok(sheet)
    }

    /// [`Stylesheet::from_path`] with strictness taken from `CONTUI_STRICT_CSS`.
    pub fn load(path: impl AsRef<Path>, config: &EnvConfig) -> Result<Self, CssError> {
        Self::from_path(path, config.strict_css)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Errors collected while this sheet was parsed.
    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    pub fn content_type(&self) -> &'static str {
        "text/css"
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn alternate(&self) -> bool {
        self.alternate
    }

    pub fn set_alternate(&mut self, alternate: bool) {
        self.alternate = alternate;
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }

    /// Mark the sheet as coming from another origin; its rules can no longer be changed.
    pub fn set_origin_clean(&mut self, origin_clean: bool) {
        self.origin_clean = origin_clean;
    }

    pub fn constructed(&self) -> bool {
        self.constructed
    }

    pub fn disallow_modification(&self) -> bool {
        self.disallow_modification
    }

    fn check_modifiable(&self) -> Result<(), StylesheetError> {
        if !self.origin_clean {
            return Err(StylesheetError::Security);
        }
        if self.disallow_modification {
            return Err(StylesheetError::NotAllowed);
        }
        Ok(())
    }

    fn only_imports_and_namespaces(&self) -> bool {
        self.rules
            .iter()
            .all(|rule| rule.is_at_rule("import") || rule.is_at_rule("namespace"))
    }

    /// Parse `text` as a single rule and insert it before `index`. Returns `index`.
    pub fn insert_rule(&mut self, text: &str, index: usize) -> Result<usize, StylesheetError> {
        self.check_modifiable()?;
        if index > self.rules.len() {
            return Err(StylesheetError::IndexSize {
                index,
                len: self.rules.len(),
            });
        }

        let rule = parse_rule(text)?;
        if rule.is_at_rule("import") && self.constructed {
            return Err(CssError::syntax("@import is not allowed in constructed stylesheets").into());
        }
        if rule.is_at_rule("namespace") && !self.only_imports_and_namespaces() {
            return Err(StylesheetError::InvalidState(
                "@namespace can only be inserted while the sheet holds @import and @namespace rules",
            ));
        }

        tracing::debug!(index, rule = %rule, "insert rule");
        self.rules.insert(index, rule);
        Ok(index)
    }

    /// Remove and return the rule at `index`.
    pub fn delete_rule(&mut self, index: usize) -> Result<Rule, StylesheetError> {
        self.check_modifiable()?;
        let Some(rule) = self.rules.get(index) else {
            return Err(StylesheetError::IndexSize {
                index,
                len: self.rules.len(),
            });
        };
        if rule.is_at_rule("namespace") && !self.only_imports_and_namespaces() {
            return Err(StylesheetError::InvalidState(
                "@namespace cannot be deleted while other rules exist",
            ));
        }
        Ok(self.rules.remove(index))
    }

    /// Replace every rule with those parsed from `text`. `@import` rules are dropped.
    pub fn replace(&mut self, text: &str) -> Result<&mut Self, StylesheetError> {
        if !self.constructed || self.disallow_modification {
            return Err(StylesheetError::NotAllowed);
        }

        let mut rules = parse_rule_list(text);
        rules.retain(|rule| {
            let import = rule.is_at_rule("import");
            if import {
                tracing::warn!(rule = %rule, "dropping @import from replaced stylesheet");
            }
            !import
        });
        self.rules = rules;
        Ok(self)
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, rule) in self.rules.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}
