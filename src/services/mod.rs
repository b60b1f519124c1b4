pub mod moneycontrol;
