pub mod chart_service;
