pub mod chromeec;
