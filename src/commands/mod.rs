pub mod cancel;
pub mod export;
pub mod hide;
pub mod list;
pub mod new;
pub mod reschedule;
pub mod show;
pub mod vary;
