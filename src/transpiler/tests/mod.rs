mod dialects;
mod rendering;
