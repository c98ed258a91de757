mod to_html;
