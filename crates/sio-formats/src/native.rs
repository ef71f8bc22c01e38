//! Native entity format: the whole entity tree as a versioned JSON document.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sio_filter::{FormatHandler, HandlerResult};
use sio_types::{Entity, EntityKind, ErrorCode, LoadParameters, SaveParameters};
use tracing::{debug, warn};

/// Value of the `format` header field.
pub const NATIVE_MAGIC: &str = "sio";

/// Current document version. Newer documents are refused.
pub const NATIVE_VERSION: u32 = 1;

const FILTER: &str = "SIO entities (*.sio)";

/// On-disk layout of a native file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeDocument {
    pub format: String,
    pub version: u32,
    pub root: Entity,
}

impl NativeDocument {
    pub fn new(root: Entity) -> Self {
        Self {
            format: NATIVE_MAGIC.to_string(),
            version: NATIVE_VERSION,
            root,
        }
    }
}

/// Handler for `*.sio` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFilter;

impl NativeFilter {
    fn parse(text: &str) -> HandlerResult<NativeDocument> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|err| {
            warn!(%err, "native file is not valid JSON");
            ErrorCode::MalformedFile
        })?;

        let magic = value.get("format").and_then(serde_json::Value::as_str);
        if magic != Some(NATIVE_MAGIC) {
            return Err(ErrorCode::WrongFileType.into());
        }
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or(ErrorCode::MalformedFile)?;
        if version > u64::from(NATIVE_VERSION) {
            warn!(version, supported = NATIVE_VERSION, "native file written by a newer version");
            return Err(ErrorCode::WrongFileType.into());
        }

        serde_json::from_value(value).map_err(|err| {
            warn!(%err, "native file has an invalid entity tree");
            ErrorCode::MalformedFile.into()
        })
    }
}

impl FormatHandler for NativeFilter {
    fn file_filters(&self, _for_load: bool) -> Vec<String> {
        vec![FILTER.to_string()]
    }

    fn default_extension(&self) -> &str {
        "sio"
    }

    fn can_load_extension(&self, upper_ext: &str) -> bool {
        upper_ext == "SIO"
    }

    fn load_file(
        &self,
        path: &Path,
        container: &mut Entity,
        _params: &mut LoadParameters,
    ) -> HandlerResult<()> {
        let text = fs::read_to_string(path).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot read native file");
            ErrorCode::Reading
        })?;
        let document = Self::parse(&text)?;

        let root = document.root;
        if matches!(root.kind(), EntityKind::Group) {
            for child in root.children() {
                container.add_child(child.clone());
            }
        } else {
            container.add_child(root);
        }
        debug!(children = container.child_count(), "native file parsed");
        Ok(())
    }

    fn save_file(
        &self,
        entity: &Entity,
        path: &Path,
        _params: &SaveParameters,
    ) -> HandlerResult<()> {
        if matches!(entity.kind(), EntityKind::Group) && entity.child_count() == 0 {
            return Err(ErrorCode::NoSave.into());
        }

        let file = File::create(path).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot create native file");
            ErrorCode::Writing
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &NativeDocument::new(entity.clone()))
            .map_err(|err| {
                warn!(path = %path.display(), %err, "cannot write native file");
                ErrorCode::Writing
            })?;
        Ok(())
    }
}
