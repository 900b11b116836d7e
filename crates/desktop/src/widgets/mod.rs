pub mod contour_overlay;
