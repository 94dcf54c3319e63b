pub mod p901_price_research;
