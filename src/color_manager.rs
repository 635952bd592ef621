// Color manager - fetch-or-create access to the single ColorService row
//
// The UI reads the theme through this type rather than touching the table.
// No caching: every call goes to the persistence context, which is assumed to
// have a single caller.

use anyhow::Result;
use log::{debug, info, warn};
use rusqlite::Connection;

use crate::db;
use crate::entities::{ColorService, SchemeLoad};
use crate::theme::ColorScheme;

pub struct ColorManager<'c> {
    conn: &'c Connection,
}

impl<'c> ColorManager<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        ColorManager { conn }
    }

    /// First stored row, or a freshly inserted default one
    pub fn color_service(&self) -> Result<ColorService> {
        if let Some(existing) = db::fetch_color_services(self.conn)?.into_iter().next() {
            return Ok(existing);
        }

        let service = ColorService::default();
        db::insert_color_service(self.conn, &service)?;
        info!("Created default color service {}", service.id);
        Ok(service)
    }

    pub fn current_scheme(&self) -> Result<SchemeLoad> {
        let service = self.color_service()?;
        let load = service.scheme();

        match &load {
            SchemeLoad::Corrupt { error, .. } => {
                warn!("Stored color scheme {} is corrupt, using light theme: {}", service.id, error);
            }
            SchemeLoad::Default(_) => debug!("No color scheme stored yet, using light theme"),
            SchemeLoad::Decoded(scheme) => debug!("Loaded color scheme '{}'", scheme.name),
        }

        Ok(load)
    }

    pub fn set_scheme(&self, scheme: &ColorScheme) -> Result<ColorService> {
        let mut service = self.color_service()?;
        service.set_scheme(scheme)?;
        db::update_color_service(self.conn, &service)?;
        info!("Color scheme set to '{}'", scheme.name);
        Ok(service)
    }

    pub fn reset(&self) -> Result<ColorService> {
        self.set_scheme(&ColorScheme::light())
    }
}
