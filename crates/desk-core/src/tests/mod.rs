mod backup;
mod models;
