pub(crate) mod basic_info_message;
