pub mod author;
pub mod category;
pub mod post;
pub mod project;
pub mod service;
pub mod testimonial;
