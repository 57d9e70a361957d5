pub mod period;
pub mod settings;
pub mod work_record;
pub mod work_status;
