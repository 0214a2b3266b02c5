//! Output path generation
//!
//! Layout: `{root}/{category}/{category} {YYYYMM}.xlsx`, matching the folder
//! layout the mirror drive uses. Category labels contain `/` (e.g.
//! "연립/다세대"), which must not become a path separator on disk.

use crate::{Category, Period};
use std::path::{Path, PathBuf};

/// File extension the portal exports.
const SPREADSHEET_EXT: &str = "xlsx";

/// Directory a category's spreadsheets live in.
pub fn category_dir(root: &Path, category: &Category) -> PathBuf {
    root.join(sanitize_label(category.label()))
}

/// Full path of one category/period spreadsheet.
pub fn spreadsheet_path(root: &Path, category: &Category, period: Period) -> PathBuf {
    category_dir(root, category).join(format!(
        "{} {period}.{SPREADSHEET_EXT}",
        sanitize_label(category.label())
    ))
}

/// Sanitize a category label for filesystem safety.
///
/// Replaces `/`, `\` and `:` with `_`; everything else (including spaces and
/// Hangul) passes through unchanged.
fn sanitize_label(label: &str) -> String {
    label.replace(['/', '\\', ':'], "_")
}
