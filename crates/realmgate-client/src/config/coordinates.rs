use std::path::Path;

use realmgate_events::FieldId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::config::json_file;
use crate::error::StoreError;

/// Screen-space pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X: {}, Y: {}", self.x, self.y)
    }
}

/// Recorded positions of the login screen's input fields.
///
/// Only valid for the resolution and window layout they were captured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginCoordinates {
    pub username: Point,
    pub password: Point,
}

impl Default for LoginCoordinates {
    fn default() -> Self {
        Self {
            username: Point::new(1692, 737),
            password: Point::new(1734, 854),
        }
    }
}

/// On-disk layout. The login button keys are never read back; they are only
/// written so older versions can still open the file.
#[derive(Serialize)]
struct CoordinatesRecord {
    username_x: i32,
    username_y: i32,
    password_x: i32,
    password_y: i32,
    login_button_x: i32,
    login_button_y: i32,
}

impl LoginCoordinates {
    pub fn get(&self, field: FieldId) -> Point {
        match field {
            FieldId::Username => self.username,
            FieldId::Password => self.password,
        }
    }

    pub fn set(&mut self, field: FieldId, point: Point) {
        match field {
            FieldId::Username => self.username = point,
            FieldId::Password => self.password = point,
        }
    }

    /// Defaults overlaid with whatever complete field positions the file holds.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut coords = Self::default();
        let Some(record) = json_file::read::<Map<String, Value>>(path)? else {
            return Ok(coords);
        };

        for field in FieldId::ALL {
            let x = record.get(&format!("{}_x", field.key())).and_then(as_i32);
            let y = record.get(&format!("{}_y", field.key())).and_then(as_i32);
            if let (Some(x), Some(y)) = (x, y) {
                coords.set(field, Point::new(x, y));
            }
        }
        Ok(coords)
    }

    /// Like [`LoginCoordinates::load`], but falls back to defaults on error
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            error!("Failed to load login coordinates: {}", e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let record = CoordinatesRecord {
            username_x: self.username.x,
            username_y: self.username.y,
            password_x: self.password.x,
            password_y: self.password.y,
            login_button_x: self.password.x.saturating_add(100),
            login_button_y: self.password.y.saturating_add(100),
        };
        json_file::write(path, &record)?;
        info!("Saved login coordinates to {}", path.display());
        Ok(())
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .and_then(|v| i32::try_from(v).ok())
}
