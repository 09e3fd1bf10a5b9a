mod controls;
mod fps;
mod panels;

pub(in crate::app) use controls::finder_matches;
