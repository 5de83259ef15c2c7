pub mod phong;
