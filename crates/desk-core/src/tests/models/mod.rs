mod profile_filter;
mod site_file;
mod widget_data;
