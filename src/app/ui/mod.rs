mod controls;
mod panels;
mod search;
