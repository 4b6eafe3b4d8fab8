mod health_check;
mod recipients;
mod send;
