//! In-memory stand-ins for the vision model and the spreadsheet.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::UploadedImage;
use crate::sheets::{SheetStore, SheetsError};
use crate::vision::{codec, VisionError, VisionModel};

/// Canned behaviour for one image name.
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Timeout,
    Unauthorized,
    /// The image bytes fail to read mid-request.
    Unreadable,
}

/// Vision model that answers from a script keyed by image name.
#[derive(Default)]
pub struct ScriptedVision {
    scripts: HashMap<String, Script>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedVision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, image: &str, raw: &str) -> Self {
        self.scripts
            .insert(image.to_string(), Script::Reply(raw.to_string()));
        self
    }

    pub fn script(mut self, image: &str, script: Script) -> Self {
        self.scripts.insert(image.to_string(), script);
        self
    }

    /// Image names in the order they were analyzed.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedVision {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn analyze(&self, image: &mut UploadedImage) -> Result<String, VisionError> {
        codec::encode(image.reader_mut())?;
        self.seen.lock().unwrap().push(image.name().to_string());

        match self.scripts.get(image.name()) {
            Some(Script::Reply(raw)) => Ok(raw.clone()),
            Some(Script::Timeout) => Err(VisionError::Timeout(60)),
            Some(Script::Unauthorized) => Err(VisionError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }),
            Some(Script::Unreadable) => Err(VisionError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "image stream ended early",
            ))),
            None => Ok(String::new()),
        }
    }
}

/// Sheet held in memory. Ranges are interpreted loosely: a range ending in
/// `A1:H1` addresses the first row, anything else the whole table.
#[derive(Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
    updates: Mutex<Vec<String>>,
    failing_names: Mutex<HashSet<String>>,
    unreachable: Mutex<bool>,
}

impl MemorySheet {
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Appends of rows whose first cell is `name` fail.
    pub fn fail_appends_for(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    /// Every call fails as if the API were down.
    pub fn go_offline(&self) {
        *self.unreachable.lock().unwrap() = true;
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }

    /// Ranges passed to `update_values`, in order.
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<(), SheetsError> {
        if *self.unreachable.lock().unwrap() {
            return Err(SheetsError::Connection("sheet unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap();
        if range.ends_with("A1:H1") {
            Ok(rows.iter().take(1).cloned().collect())
        } else {
            Ok(rows.clone())
        }
    }

    async fn update_values(&self, range: &str, new_rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.check_online()?;
        self.updates.lock().unwrap().push(range.to_string());
        let mut rows = self.rows.lock().unwrap();
        for (i, row) in new_rows.into_iter().enumerate() {
            if i < rows.len() {
                rows[i] = row;
            } else {
                rows.push(row);
            }
        }
        Ok(())
    }

    async fn append_values(&self, _range: &str, new_rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.check_online()?;
        let failing = self.failing_names.lock().unwrap();
        if new_rows
            .iter()
            .any(|row| row.first().is_some_and(|name| failing.contains(name)))
        {
            return Err(SheetsError::Api {
                status: 503,
                message: "The service is currently unavailable".to_string(),
            });
        }
        self.rows.lock().unwrap().extend(new_rows);
        Ok(())
    }
}
