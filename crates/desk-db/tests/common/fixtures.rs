#![allow(dead_code)]

use desk_core::{Site, SiteFile};

use uuid::Uuid;

/// Creates a test Site
pub fn create_test_site(name: &str, profile_name: Option<&str>) -> Site {
    Site::new(name.to_string(), profile_name.map(str::to_string))
}

/// Creates a file of `size` bytes filled with a pattern derived from `seed`
pub fn create_test_file(site_id: Uuid, path: &str, size: usize, seed: u8) -> SiteFile {
    let bytes = (0..size).map(|i| seed.wrapping_add(i as u8)).collect();
    SiteFile::new(site_id, path.to_string(), "text/html".to_string(), bytes)
}

/// Site with its cached totals filled from `files`
pub fn with_totals(mut site: Site, files: &[SiteFile]) -> Site {
    site.file_count = files.len() as u64;
    site.total_bytes = files.iter().map(|f| f.size).sum();
    site
}
