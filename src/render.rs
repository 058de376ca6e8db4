use tracing::debug;
use crate::error::SerializationError;
use crate::field::FieldNode;
use crate::writer::{QueryWriter, WriterOptions};

/// Rendered query text plus a CRC32 fingerprint of it. Identical field trees
/// always produce identical text, so the fingerprint is a stable cache key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    pub text: String,
    pub fingerprint: u32,
}

impl RenderedDocument {
    pub fn new(text: String) -> RenderedDocument {
        let fingerprint = crc32fast::hash(text.as_bytes());
        RenderedDocument { text, fingerprint }
    }
}

pub fn render(node: &FieldNode, depth: usize) -> Result<String, SerializationError> {
    render_with(node, depth, &WriterOptions::default())
}

pub fn render_with(node: &FieldNode, depth: usize, options: &WriterOptions) -> Result<String, SerializationError> {
    let mut writer = QueryWriter::new(options, depth);
    write_field(&mut writer, node)?;
    Ok(writer.build_string())
}

pub fn render_document(root: &FieldNode) -> Result<RenderedDocument, SerializationError> {
    let document = RenderedDocument::new(render(root, 0)?);
    debug!(fingerprint = document.fingerprint, root = %root.name, "rendered document");
    Ok(document)
}

fn write_field(writer: &mut QueryWriter<'_>, node: &FieldNode) -> Result<(), SerializationError> {
    let head = field_head(node)?;
    if node.is_leaf() {
        writer.line(&head);
    } else {
        writer.begin_indent(&format!("{} {{", head));
        for subfield in &node.subfields {
            write_field(writer, subfield)?;
        }
        writer.end_indent("}");
    }
    Ok(())
}

fn field_head(node: &FieldNode) -> Result<String, SerializationError> {
    let mut head = String::new();
    if let Some(alias) = node.effective_alias() {
        head.push_str(alias);
        head.push_str(": ");
    }
    head.push_str(&node.name);

    if !node.arguments.is_empty() {
        let args: Vec<String> = node.arguments
            .iter()
            .map(|(key, value)| {
                value.encode()
                    .map(|encoded| format!("{}: {}", key, encoded))
                    .map_err(|reason| SerializationError::Argument {
                        field: node.name.clone(),
                        key: key.clone(),
                        reason
                    })
            })
            .collect::<Result<_, _>>()?;
        head.push('(');
        head.push_str(&args.join(", "));
        head.push(')');
    }
    Ok(head)
}
