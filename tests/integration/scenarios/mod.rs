mod proxy;
mod views;
