//! Wire formats for calendar values, matching the accepted input formats.

time::serde::format_description!(pub date, Date, "[year]-[month]-[day]");
time::serde::format_description!(pub hour_minute, Time, "[hour]:[minute]");
