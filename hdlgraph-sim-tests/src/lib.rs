pub mod designs;
