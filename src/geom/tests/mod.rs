mod test_height_field_basic;
mod test_marching_cubes_basic;
