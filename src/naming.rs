use crate::color::Color;

/// Inclusive channel bounds describing one named color region.
struct NamedRange
{
	name: &'static str,
	r: (u8, u8),
	g: (u8, u8),
	b: (u8, u8),
	priority: u8,
}

impl NamedRange
{
	fn matches(&self, color: Color) -> bool
	{
		(self.r.0..=self.r.1).contains(&color.r)
			&& (self.g.0..=self.g.1).contains(&color.g)
			&& (self.b.0..=self.b.1).contains(&color.b)
	}
}

const fn at_least(min: u8) -> (u8, u8)
{
	(min, 255)
}

const fn at_most(max: u8) -> (u8, u8)
{
	(0, max)
}

/// Named regions of RGB space. Lower priority numbers win; table order breaks ties.
static COLOR_RANGES: &[NamedRange] =
&[
	NamedRange { name: "red", r: at_least(128), g: at_most(100), b: at_most(100), priority: 1 },
	NamedRange { name: "dark-red", r: (50, 128), g: at_most(50), b: at_most(50), priority: 2 },
	NamedRange { name: "light-red", r: at_least(200), g: at_most(150), b: at_most(150), priority: 3 },

	NamedRange { name: "green", r: at_most(100), g: at_least(128), b: at_most(100), priority: 1 },
	NamedRange { name: "dark-green", r: at_most(50), g: (50, 128), b: at_most(50), priority: 2 },
	NamedRange { name: "light-green", r: at_most(150), g: at_least(200), b: at_most(150), priority: 3 },

	NamedRange { name: "blue", r: at_most(100), g: at_most(100), b: at_least(128), priority: 1 },
	NamedRange { name: "dark-blue", r: at_most(50), g: at_most(50), b: (50, 128), priority: 2 },
	NamedRange { name: "light-blue", r: at_most(150), g: at_most(150), b: at_least(200), priority: 3 },

	NamedRange { name: "yellow", r: at_least(180), g: at_least(180), b: at_most(100), priority: 1 },
	NamedRange { name: "orange", r: at_least(200), g: (100, 200), b: at_most(50), priority: 1 },
	NamedRange { name: "purple", r: at_least(100), g: at_most(100), b: at_least(150), priority: 1 },

	NamedRange { name: "white", r: at_least(220), g: at_least(220), b: at_least(220), priority: 1 },
	NamedRange { name: "light-gray", r: (180, 219), g: (180, 219), b: (180, 219), priority: 2 },
	NamedRange { name: "gray", r: (100, 179), g: (100, 179), b: (100, 179), priority: 3 },
	NamedRange { name: "dark-gray", r: (50, 99), g: (50, 99), b: (50, 99), priority: 4 },
	NamedRange { name: "black", r: at_most(49), g: at_most(49), b: at_most(49), priority: 5 },

	NamedRange { name: "brown", r: (100, 180), g: (50, 150), b: at_most(100), priority: 1 },
	NamedRange { name: "pink", r: at_least(200), g: (100, 200), b: (150, 200), priority: 1 },
	NamedRange { name: "cyan", r: at_most(100), g: at_least(150), b: at_least(150), priority: 1 },
];

/// Coarse human-readable name for a color.
pub fn color_name(color: Color) -> &'static str
{
	// min_by_key keeps the first of equal minimums, so table order breaks ties.
	if let Some(range) = COLOR_RANGES.iter().filter(|range| range.matches(color)).min_by_key(|range| range.priority)
	{
		return range.name;
	}

	describe_dominant_channel(color)
}

/// Fallback naming by the strongest channel.
fn describe_dominant_channel(color: Color) -> &'static str
{
	let Color { r, g, b } = color;
	let max: u8 = r.max(g).max(b);

	if max < 50
	{
		return "black";
	}

	if max > 200
	{
		if r.abs_diff(g) < 30 && g.abs_diff(b) < 30
		{
			"white"
		}
		else if r > g && r > b
		{
			"light-red"
		}
		else if g > r && g > b
		{
			"light-green"
		}
		else
		{
			"light-blue"
		}
	}
	else if r > g && r > b
	{
		"red"
	}
	else if g > r && g > b
	{
		"green"
	}
	else
	{
		"blue"
	}
}
