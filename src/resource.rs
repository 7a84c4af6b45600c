use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("invalid resource address '{0}'")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Managed,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InstanceKey {
    /// `count` instance
    Index(u64),
    /// `for_each` instance
    Key(String),
}

/// Terraform resource address as the test harness spells it.
///
/// `count` instances use the flat form (`type.name.0`) and `for_each`
/// instances the bracket form (`type.name["key"]`). Data sources carry a
/// `data.` prefix and module resources one `module.<name>.` per level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    pub module: Vec<String>,
    pub mode: Mode,
    pub resource_type: String,
    pub name: String,
    pub key: Option<InstanceKey>,
}

impl ResourceAddress {
    /// Root-module managed resource, `type.name`.
    pub fn managed(resource_type: &str, name: &str) -> Self {
        Self {
            module: Vec::new(),
            mode: Mode::Managed,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            key: None,
        }
    }

    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::Invalid(address.to_string());

        let segments = split_segments(address).ok_or_else(invalid)?;
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }

        // Module names may carry their own instance key, `module.a[0]`.
        let mut rest = segments.as_slice();
        let mut module = Vec::new();
        while let ["module", name, tail @ ..] = rest {
            split_bracket_key(name).ok_or_else(invalid)?;
            module.push(name.to_string());
            rest = tail;
        }

        let (mode, rest) = match rest {
            ["data", tail @ ..] => (Mode::Data, tail),
            _ => (Mode::Managed, rest),
        };

        let (last, head) = rest.split_last().ok_or_else(invalid)?;
        let (last, bracket_key) = split_bracket_key(last).ok_or_else(invalid)?;
        if last.contains(['[', ']']) || head.iter().any(|s| s.contains(['[', ']'])) {
            return Err(invalid());
        }

        let (resource_type, name, index) = match head {
            [resource_type] => (*resource_type, last, None),
            [resource_type, name] => {
                let index: u64 = last.parse().map_err(|_| invalid())?;
                (*resource_type, *name, Some(index))
            }
            _ => return Err(invalid()),
        };

        let key = match (index, bracket_key) {
            (Some(_), Some(_)) => return Err(invalid()),
            (Some(i), None) => Some(InstanceKey::Index(i)),
            (None, key) => key,
        };

        Ok(Self {
            module,
            mode,
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            key,
        })
    }

    pub fn with_index(&self, index: u64) -> Self {
        Self {
            key: Some(InstanceKey::Index(index)),
            ..self.clone()
        }
    }

    /// Same instance without its key, e.g. the resource block of a `count` instance.
    pub fn without_key(&self) -> Self {
        Self {
            key: None,
            ..self.clone()
        }
    }

    /// Address in the syntax the `terraform` CLI accepts (`type.name[0]`).
    pub fn cli_address(&self) -> String {
        let mut out = self.prefix();
        match &self.key {
            Some(InstanceKey::Index(i)) => out.push_str(&format!("[{}]", i)),
            Some(InstanceKey::Key(k)) => out.push_str(&format!("[\"{}\"]", k)),
            None => {}
        }
        out
    }

    fn prefix(&self) -> String {
        let mut out = String::new();
        for m in &self.module {
            out.push_str("module.");
            out.push_str(m);
            out.push('.');
        }
        if self.mode == Mode::Data {
            out.push_str("data.");
        }
        out.push_str(&self.resource_type);
        out.push('.');
        out.push_str(&self.name);
        out
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())?;
        match &self.key {
            Some(InstanceKey::Index(i)) => write!(f, ".{}", i),
            Some(InstanceKey::Key(k)) => write!(f, "[\"{}\"]", k),
            None => Ok(()),
        }
    }
}

// Splits on `.` outside brackets, so `["a.b"]` stays one segment.
fn split_segments(address: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut in_brackets = false;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in address.char_indices() {
        match c {
            '"' if in_brackets => in_quotes = !in_quotes,
            '[' if !in_quotes => {
                if in_brackets {
                    return None;
                }
                in_brackets = true;
            }
            ']' if !in_quotes => {
                if !in_brackets {
                    return None;
                }
                in_brackets = false;
            }
            '.' if !in_brackets => {
                segments.push(&address[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_brackets || in_quotes {
        return None;
    }
    segments.push(&address[start..]);
    Some(segments)
}

// Splits one segment, `name["key"]` or `name[0]`, into name and key.
// Returns None on malformed brackets.
fn split_bracket_key(segment: &str) -> Option<(&str, Option<InstanceKey>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, None));
    };
    let inner = segment[open..].strip_prefix('[')?.strip_suffix(']')?;
    let key = match inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(k) => InstanceKey::Key(k.to_string()),
        None => InstanceKey::Index(inner.parse().ok()?),
    };
    Some((&segment[..open], Some(key)))
}
