pub mod desktop_profile;
pub mod local_web;
pub mod profile_filter;
pub mod site;
pub mod site_file;
pub mod widget_data;
