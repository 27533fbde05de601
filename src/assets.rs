/// Image and depth-map decoding plus working-resolution preparation.
pub mod decode;
