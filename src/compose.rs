use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use crate::error::CompositionError;
use crate::field::{FieldNode, RequestBinding};
use crate::keygen::KeyGenerator;
use crate::sink::Sink;

pub const MAX_ALIAS_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response key to sink, in the order the fields were bound.
#[derive(Debug, Default)]
pub struct DispatchTable {
    entries: Vec<(String, Sink)>,
}

impl DispatchTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Sink> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, sink)| sink)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Sink)> {
        self.entries.iter().map(|(key, sink)| (key.as_str(), sink))
    }
}

#[derive(Debug)]
pub struct ComposedDocument {
    pub root: FieldNode,
    pub table: DispatchTable,
}

/// Merges independent top-level fields into one operation. Sibling fields
/// must have distinct response keys, so a field whose key is taken gets a
/// generated alias.
#[derive(Clone)]
pub struct Composer {
    keys: Arc<KeyGenerator>,
}

impl Composer {
    pub fn new(keys: Arc<KeyGenerator>) -> Composer {
        Composer { keys }
    }

    pub fn compose(
        &self,
        kind: OperationKind,
        bindings: Vec<RequestBinding>
    ) -> Result<ComposedDocument, CompositionError> {
        if bindings.is_empty() {
            return Err(CompositionError::NoBindings);
        }

        let mut reserved: HashSet<String> = HashSet::with_capacity(bindings.len());
        let mut root = FieldNode::new(kind.as_str());
        let mut table = DispatchTable::default();

        for RequestBinding { mut field, sink } in bindings {
            let natural = field.key().to_string();
            let key = if reserved.contains(&natural) {
                let alias = self.free_alias(&reserved)?;
                debug!(field = %field.name, taken = %natural, %alias, "aliasing duplicate field");
                field.alias = Some(alias.clone());
                alias
            } else {
                natural
            };
            reserved.insert(key.clone());
            table.entries.push((key, sink));
            root.subfields.push(field);
        }

        debug!(operation = %kind, fields = table.len(), "composed document");
        Ok(ComposedDocument { root, table })
    }

    fn free_alias(&self, reserved: &HashSet<String>) -> Result<String, CompositionError> {
        for _ in 0..MAX_ALIAS_ATTEMPTS {
            let candidate = self.keys.next_key();
            if !reserved.contains(&candidate) {
                return Ok(candidate);
            }
        }
        Err(CompositionError::AliasExhausted { attempts: MAX_ALIAS_ATTEMPTS })
    }
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new(Arc::new(KeyGenerator::new()))
    }
}

impl fmt::Debug for Composer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer").finish_non_exhaustive()
    }
}
