mod health_check;
mod helpers;
