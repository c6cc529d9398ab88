pub mod site_archive_repository;
