mod filament;
mod referential_integrity;
mod spool;
mod vendor;
