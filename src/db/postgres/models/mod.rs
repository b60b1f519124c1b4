pub mod company_info;
