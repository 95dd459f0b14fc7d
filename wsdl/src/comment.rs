//! Documentation block parsing.
//!
//! Blocks are accepted either with `/** ... */` decoration or as plain lines (the form
//! produced from `///` comments). Annotations follow the `@param Type $name text`,
//! `@return Type text` and `@var Type` conventions, where a `[]` suffix on the type
//! marks repetition.

use once_cell::sync::Lazy;
use regex::Regex;

static PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@param\s+(?:object\s+)?(\S+?)(\[\])?\s+\$(\w+)[ \t]*([^\r\n]*)")
        .expect("valid @param pattern")
});

static RETURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@return\s+([^\s\[\]()]+)(\[\])?[ \t]*([^\r\n]*)").expect("valid @return pattern")
});

static VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@var\s+(?:object\s+)?([\w.]+)(\[\])?").expect("valid @var pattern")
});

static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(\w+)").expect("valid annotation pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamAnnotation {
    pub type_name: String,
    pub repeated: bool,
    pub name: String,
    pub docs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnAnnotation {
    pub type_name: String,
    pub repeated: bool,
    pub docs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarAnnotation {
    pub type_name: String,
    pub repeated: bool,
}

fn trailing_text(text: &str) -> String {
    let text = text.trim_end();
    text.strip_suffix("*/").unwrap_or(text).trim().to_owned()
}

pub fn params(doc: &str) -> Vec<ParamAnnotation> {
    PARAM
        .captures_iter(doc)
        .map(|captures| ParamAnnotation {
            type_name: captures[1].to_owned(),
            repeated: captures.get(2).is_some(),
            name: captures[3].to_owned(),
            docs: trailing_text(&captures[4]),
        })
        .collect()
}

pub fn return_type(doc: &str) -> Option<ReturnAnnotation> {
    RETURN.captures(doc).map(|captures| ReturnAnnotation {
        type_name: captures[1].to_owned(),
        repeated: captures.get(2).is_some(),
        docs: trailing_text(&captures[3]),
    })
}

pub fn var_type(doc: &str) -> Option<VarAnnotation> {
    VAR.captures(doc).map(|captures| VarAnnotation {
        type_name: captures[1].to_owned(),
        repeated: captures.get(2).is_some(),
    })
}

fn strip_decoration(doc: &str) -> &str {
    let doc = doc.trim();
    let doc = doc.strip_prefix("/**").unwrap_or(doc);
    doc.strip_suffix("*/").unwrap_or(doc)
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('*').unwrap_or(line).trim()
}

/// Body text of a block without annotations, lines joined without separators.
pub fn summary(doc: &str) -> String {
    strip_decoration(doc)
        .lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty() && !line.starts_with('@'))
        .collect()
}

/// Structured view of a block: first line, description paragraph lines and
/// annotations grouped by name in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    summary: String,
    description: Vec<String>,
    annotations: Vec<(String, Vec<String>)>,
}

impl Comment {
    pub fn parse(text: &str) -> Self {
        let mut comment = Self::default();

        let lines = strip_decoration(text)
            .lines()
            .map(|line| strip_marker(line).replace('$', ""))
            .skip_while(|line| line.is_empty());

        for (index, line) in lines.enumerate() {
            if index == 0 {
                comment.summary = line;
            } else if line.is_empty() {
                if !comment.description.is_empty() {
                    comment.description.push(String::new());
                }
            } else if line.starts_with('@') {
                comment.add_annotation(line);
            } else {
                comment.description.push(line);
            }
        }

        while comment.description.last().map_or(false, String::is_empty) {
            comment.description.pop();
        }

        comment
    }

    fn add_annotation(&mut self, text: String) {
        let name = match ANNOTATION.captures(&text) {
            Some(captures) => captures[1].to_owned(),
            None => return,
        };

        match self.annotations.iter_mut().find(|(key, _)| *key == name) {
            Some((_, values)) => values.push(text),
            None => self.annotations.push((name, vec![text])),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    pub fn annotation(&self, name: &str) -> &[String] {
        self.annotations
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        !self.annotation(name).is_empty()
    }

    pub fn annotations(&self) -> &[(String, Vec<String>)] {
        &self.annotations
    }
}
